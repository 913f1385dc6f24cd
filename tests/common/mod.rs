// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Functions used in various integration tests.

use std::{
    fs::File,
    io::{BufRead, BufReader},
};

/// Test utility. Diff the contents of two files without the first `skip` lines.
#[allow(dead_code)]
pub(super) fn diff_files_ignore_first(file1: &str, file2: &str, skip: usize) -> bool {
    let content1 = read_file_without_first_lines(file1, skip);
    let content2 = read_file_without_first_lines(file2, skip);
    content1 == content2
}

fn read_file_without_first_lines(file: &str, skip: usize) -> Vec<String> {
    let reader = BufReader::new(File::open(file).unwrap());
    reader
        .lines()
        .skip(skip) // skip the header
        .map(|line| line.unwrap())
        .collect()
}

/// Test utility. Read a two-column distribution file, skipping comments.
#[allow(dead_code)]
pub(super) fn read_distribution(file: &str) -> Vec<(f64, usize)> {
    let reader = BufReader::new(File::open(file).unwrap());
    reader
        .lines()
        .map(|line| line.unwrap())
        .filter(|line| !line.starts_with('#'))
        .map(|line| {
            let mut split = line.split_whitespace();
            let center = split.next().unwrap().parse::<f64>().unwrap();
            let count = split.next().unwrap().parse::<usize>().unwrap();
            assert!(split.next().is_none(), "Data line must have 2 columns");
            (center, count)
        })
        .collect()
}
