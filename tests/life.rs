use gridlife::{io, simulate, Grid, Transport};
use std::fs;

fn grid(rows: usize, cols: usize, alive: &[(usize, usize)]) -> Grid {
    Grid::from_cells(rows, cols, alive.iter().copied().map(Ok)).unwrap()
}

/// A reproducible soup of live cells, about one in three alive.
fn soup(rows: usize, cols: usize, seed: u64) -> Grid {
    let mut state = seed;
    let cells = (0..rows)
        .flat_map(|i| (0..cols).map(move |j| (i, j)))
        .filter(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) % 3 == 0
        })
        .collect::<Vec<_>>();
    grid(rows, cols, &cells)
}

fn divisors(n: usize) -> impl Iterator<Item = usize> {
    (1..=n).filter(move |k| n % k == 0)
}

#[test]
fn block_is_a_still_life() {
    let block = [(1, 1), (1, 2), (2, 1), (2, 2)];
    for generations in 1..=4 {
        for workers in divisors(4) {
            let result = simulate(&grid(4, 4, &block), generations, workers, Transport::Local).unwrap();
            assert_eq!(result.alive_cells(), block.to_vec());
        }
    }
}

#[test]
fn block_on_a_three_by_three_grid() {
    let block = [(1, 1), (1, 2), (2, 1), (2, 2)];
    let result = simulate(&grid(3, 3, &block), 5, 3, Transport::Local).unwrap();
    assert_eq!(result.alive_cells(), block.to_vec());
}

#[test]
fn blinker_oscillates_across_strip_boundaries() {
    let horizontal = [(1, 0), (1, 1), (1, 2)];
    let vertical = vec![(0, 1), (1, 1), (2, 1)];

    for workers in divisors(6) {
        let start = grid(6, 5, &horizontal);
        let one = simulate(&start, 1, workers, Transport::Local).unwrap();
        assert_eq!(one.alive_cells(), vertical, "{} workers", workers);
        let two = simulate(&start, 2, workers, Transport::Local).unwrap();
        assert_eq!(two.alive_cells(), horizontal.to_vec(), "{} workers", workers);
    }
}

#[test]
fn lone_corner_cell_dies() {
    for workers in divisors(4) {
        let result = simulate(&grid(4, 4, &[(0, 0)]), 1, workers, Transport::Local).unwrap();
        assert_eq!(result.alive_count(), 0);
    }
    let result = simulate(&grid(4, 4, &[(3, 3)]), 1, 4, Transport::Local).unwrap();
    assert_eq!(result.alive_count(), 0);
}

#[test]
fn glider_crosses_every_strip() {
    let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
    // After four generations a glider is the same shape, one cell down and
    // one cell right.
    let moved: Vec<_> = glider.iter().map(|&(i, j)| (i + 1, j + 1)).collect();
    for workers in divisors(8) {
        let result = simulate(&grid(8, 8, &glider), 4, workers, Transport::Local).unwrap();
        assert_eq!(result.alive_cells(), moved, "{} workers", workers);
    }
}

#[test]
fn decomposition_does_not_change_the_result() {
    let start = soup(12, 10, 42);
    let serial = simulate(&start, 9, 1, Transport::Local).unwrap();

    for workers in divisors(12).skip(1) {
        let parallel = simulate(&start, 9, workers, Transport::Local).unwrap();
        assert_eq!(parallel, serial, "{} workers", workers);
    }
}

#[test]
fn tcp_fleet_matches_serial() {
    let start = soup(8, 7, 7);
    let serial = simulate(&start, 5, 1, Transport::Local).unwrap();
    let tcp = simulate(&start, 5, 4, Transport::Tcp).unwrap();
    assert_eq!(tcp, serial);
}

#[test]
fn uneven_split_is_rejected() {
    assert!(simulate(&Grid::new(10, 4), 1, 3, Transport::Local).is_err());
}

#[test]
fn written_cells_read_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("soup.csv");
    let original = soup(9, 11, 3);

    io::write_cells(&path, &original).unwrap();
    let reread = Grid::from_cells(9, 11, io::read_cells(&path).unwrap()).unwrap();
    assert_eq!(reread, original);
    assert_eq!(reread.alive_cells(), original.alive_cells());
}

#[test]
fn malformed_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "1,1\n2,two\n").unwrap();
    assert!(Grid::from_cells(4, 4, io::read_cells(&path).unwrap()).is_err());
}
