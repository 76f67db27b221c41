//! Build script for gctracer.
//!
//! Prints feature hints so users know where trace output and diagnostics
//! will go for the feature set they enabled.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_LOG");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PARKING_LOT");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DIAGNOSTICS");

    let log_enabled = env::var("CARGO_FEATURE_LOG").is_ok();
    let parking_lot_enabled = env::var("CARGO_FEATURE_PARKING_LOT").is_ok();
    let diagnostics_enabled = env::var("CARGO_FEATURE_DIAGNOSTICS").is_ok();

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";

    if log_enabled {
        emit_info("log integration enabled");
        emit_note("Cycles are logged at debug level; GCTRACER_TRACE=1 promotes them to info.");
        if diagnostics_enabled {
            emit_note("'diagnostics' has no effect with 'log': diagnostics already go to the logger.");
        }
    }

    if parking_lot_enabled {
        emit_info("Using parking_lot for SharedTracer");
    }

    if is_release && !log_enabled && !diagnostics_enabled {
        emit_warning("Release build without 'log' or 'diagnostics': GT diagnostics are silent");
        emit_note("Register a listener with GcTracer::on_event to observe them.");
    }
}

fn emit_info(msg: &str) {
    println!("cargo:warning=[gctracer] {}", msg);
}

fn emit_note(msg: &str) {
    println!("cargo:warning=[gctracer]    {}", msg);
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[gctracer] warning: {}", msg);
}
