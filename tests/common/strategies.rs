//! Proptest strategies for queue shapes

#![allow(dead_code)]

use proptest::prelude::*;

/// Queue length and page size, both small enough to run quickly
pub fn queue_shape_strategy() -> impl Strategy<Value = (usize, usize)> {
    (0usize..60, 1usize..12)
}

/// Image paths as the database may store them: relative or absolute
pub fn image_path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}\\.png",
        "/[a-z]{1,8}(/[a-z0-9]{1,8}){0,3}\\.png",
        "https://cdn\\.test/[a-z]{1,8}\\.png",
    ]
}
