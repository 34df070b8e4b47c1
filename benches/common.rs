use mrz_vision::tools::{dataset_iter, dataset_root_from_env};
use std::env;
use std::path::PathBuf;

/// Default bench limit from `MRZ_BENCH_LIMIT`; unset or `0` means the full dataset.
pub fn bench_limit_from_env() -> Option<usize> {
    env::var("MRZ_BENCH_LIMIT")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v != 0)
}

pub fn collect_dataset_images() -> (PathBuf, Vec<PathBuf>) {
    let root = dataset_root_from_env();
    let images: Vec<PathBuf> = dataset_iter(&root, bench_limit_from_env()).collect();
    (root, images)
}
