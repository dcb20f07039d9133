//! # QBASIC
//!
//! An interpreter for a structured dialect of classic BASIC.
//! Programs may be line-numbered, labelled, or fully structured:
//!
//! ```text
//! 10 PRINT "HELLO, WORLD"
//! 20 GOTO 10
//! ```
//!
//! The [`lang`] module turns source text into a [`lang::ast::Program`];
//! the [`mach`] module walks that program against a typed runtime with
//! a scoped environment, dynamic arrays, file handles, and the classic
//! built-in function set.

pub mod lang;
pub mod mach;
