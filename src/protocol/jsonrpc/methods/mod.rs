// Copyright (c) 2025 Kapili RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Built-in demonstration methods.
//!
//! These methods exercise both parameter styles of JSON-RPC: `Main.Echo` takes named
//! parameters and `Main.Positional` takes a positional array served by a two-stage
//! handler chain.

pub mod echo;
pub mod positional;

// Re-exports
pub use echo::register_echo_method;
pub use positional::register_positional_method;
