//! Utility functions intended for use within the [`crate::message`] module.

use std::io::prelude::*;

/// Read a little-endian `u64` length prefix out of the given stream.
pub fn read_usize<R: Read>(stream: &mut R) -> std::io::Result<usize> {
    let mut buffer = [0; 8];
    stream.read_exact(&mut buffer)?;
    Ok(u64::from_le_bytes(buffer) as usize)
}

/// Read the given number of bytes from a stream, into a `Vec<u8>`.
pub fn read_bytes_vec<R: Read>(stream: &mut R, size: usize) -> std::io::Result<Vec<u8>> {
    let mut buffer = vec![0; size];
    stream.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Read one length-prefixed frame from a stream.
pub fn read_frame<R: Read>(stream: &mut R) -> std::io::Result<Vec<u8>> {
    let len = read_usize(stream)?;
    read_bytes_vec(stream, len)
}

/// Write one length-prefixed frame to a stream.
pub fn write_frame<W: Write>(stream: &mut W, message: &[u8]) -> std::io::Result<()> {
    stream.write_all(&(message.len() as u64).to_le_bytes())?;
    stream.write_all(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_read_back_in_order() {
        let mut wire = Vec::new();
        write_frame(&mut wire, &[1, 0, 1]).unwrap();
        write_frame(&mut wire, &[]).unwrap();
        let mut stream = wire.as_slice();
        assert_eq!(read_frame(&mut stream).unwrap(), vec![1, 0, 1]);
        assert_eq!(read_frame(&mut stream).unwrap(), Vec::<u8>::new());
        assert!(read_frame(&mut stream).is_err());
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let mut wire = Vec::new();
        write_frame(&mut wire, &[1, 1, 1, 1]).unwrap();
        wire.truncate(10);
        assert!(read_frame(&mut wire.as_slice()).is_err());
    }
}
