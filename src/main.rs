// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

use std::process;

mod application;

fn main() {
    if application::run().is_err() {
        process::exit(1);
    }

    process::exit(0);
}
