//! Strata Core Types and Definitions
//!
//! This crate provides the foundational types for working with draw.io
//! documents. It includes:
//!
//! - **Elements**: An owned, order-preserving XML element tree ([`element::Element`])
//! - **Cells**: A read-only view of graph cells, including `object` wrappers ([`cell::Cell`])
//! - **XML**: Reading and writing element trees ([`xml`] module)
//! - **Errors**: [`error::XmlError`] and the positioned [`error::ParseError`]

pub mod cell;
pub mod element;
pub mod error;
pub mod xml;
