// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod command;
pub mod config;

#[cfg(test)]
pub(crate) mod test_support;
