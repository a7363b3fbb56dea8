//! Test doubles for the repository traits: mockall mocks for expectation
//! style tests and an in-memory store for stateful ones.

pub mod memory;
pub mod repositories;
