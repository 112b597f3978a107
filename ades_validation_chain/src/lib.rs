// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Chain engine and constraint model for AdES signature validation.
//!
//! Every validation step is a [`chain::Chain`] of levelled checks evaluated against a context.
//! The levels come from a [`policy::ValidationPolicy`]; results are expressed as a
//! [`conclusion::Conclusion`] carrying an [`indication::Indication`], an optional
//! [`indication::SubIndication`] and [`message::MessageTag`]s that a
//! [`message::MessageCatalog`] turns into text after the fact.

pub mod algorithm;
pub mod audit;
pub mod chain;
pub mod conclusion;
pub mod error;
pub mod ids;
pub mod indication;
pub mod message;
pub mod policy;

pub use audit::{ConstraintRecord, ConstraintStatus, ConstraintTrace};
pub use chain::{Chain, ChainItem, ChainOutcome, Check, FnCheck};
pub use conclusion::{Conclusion, Message};
pub use error::ValidationError;
pub use ids::{TokenId, TokenKind};
pub use indication::{Indication, SubIndication};
pub use message::{tags, DefaultMessageCatalog, MessageCatalog, MessageTag};
pub use policy::{Level, LevelConstraint, ValidationPolicy, ValidationPolicyBuilder};
