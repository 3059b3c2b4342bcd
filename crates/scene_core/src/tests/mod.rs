//! Crate-level scenario tests driving the full frame loop
