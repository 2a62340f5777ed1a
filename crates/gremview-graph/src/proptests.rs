//! Property-based tests for identity and assembly.
