#![forbid(unsafe_code)]

//! Keyed, observable sequences.
//!
//! # Role
//! `keyseq` provides [`KeyedSequence`], an order-preserving list whose
//! elements expose a key through the [`Keyed`] trait. It serves positional
//! access (index-based insert, replace, remove) and associative access
//! (first/last match by key) from one backing `Vec`, and tells subscribers
//! about every structural change.
//!
//! # Primary responsibilities
//! - **KeyedSequence**: storage, absence checks, and linear-scan lookups.
//! - **Keyed**: the key capability elements implement.
//! - **reactive**: `(kind, start, count)` change notifications with RAII
//!   subscriptions.
//!
//! # How it fits in a UI
//! A view layer subscribes to a sequence and receives [`ListChange`]
//! values synchronously, in registration order, with the post-mutation
//! contents. The sequence knows nothing about rendering.
//!
//! # Example
//!
//! ```
//! use keyseq::{Keyed, KeyedSequence, ListChange};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Tunnel {
//!     name: String,
//! }
//!
//! impl Keyed for Tunnel {
//!     type Key = String;
//!     fn key(&self) -> &String {
//!         &self.name
//!     }
//! }
//!
//! let mut tunnels = KeyedSequence::new();
//! let changes = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&changes);
//! let _sub = tunnels.subscribe(move |change, _items: &[Tunnel]| sink.borrow_mut().push(change));
//!
//! tunnels
//!     .append_all([
//!         Tunnel { name: "home".into() },
//!         Tunnel { name: "office".into() },
//!     ])
//!     .unwrap();
//!
//! assert_eq!(tunnels.index_of_key("office"), Some(1));
//! assert!(tunnels.append(None::<Tunnel>).is_err());
//! assert_eq!(*changes.borrow(), vec![ListChange::inserted(0, 2)]);
//! ```

pub mod config;
pub mod error;
pub mod keyed;
pub mod reactive;
pub mod sequence;

pub use config::SequenceConfig;
pub use error::{Result, SequenceError};
pub use keyed::Keyed;
pub use reactive::{ChangeKind, ListChange, ObserverList, Subscription};
pub use sequence::KeyedSequence;
