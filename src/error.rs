//! Error types for tristore.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TristoreError>;

/// Contract violations are rejected synchronously and never touch a replica;
/// [`TristoreError::VotingFailure`] is the one fault the redundancy cannot
/// mask.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TristoreError {
  #[error("address {address} out of range (store depth {depth})")]
  AddressOutOfRange { address: usize, depth: usize },

  #[error("data width mismatch: store word is {expected} bytes, got {actual}")]
  DataWidthMismatch { expected: usize, actual: usize },

  #[error("mask width mismatch: expected {expected} mask bytes, got {actual}")]
  MaskWidthMismatch { expected: usize, actual: usize },

  #[error("mask lane mismatch: store word has {expected} byte lanes, mask covers {actual}")]
  MaskLaneMismatch { expected: usize, actual: usize },

  #[error("voting failure at address {address}: all three replicas disagree")]
  VotingFailure { address: usize },

  #[error("invalid store configuration: {0}")]
  InvalidConfig(String),
}
