//! Magnitude Core Runtime
//!
//! Foundational primitives shared by the magnitude chart crates:
//!
//! - **State Machines**: typed, guarded state machines for pointer-driven
//!   interaction states (hover, press, drag)
//!
//! # Example
//!
//! ```rust
//! use magnitude_core::fsm::StateMachine;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Light { Off, On }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Switch { Flip }
//!
//! let mut fsm = StateMachine::<Light, Switch, bool>::builder(Light::Off)
//!     .on_if(Light::Off, Switch::Flip, Light::On, |powered| *powered)
//!     .on(Light::On, Switch::Flip, Light::Off)
//!     .build();
//!
//! assert_eq!(fsm.send(Switch::Flip, &false), Light::Off);
//! assert_eq!(fsm.send(Switch::Flip, &true), Light::On);
//! ```

pub mod fsm;

pub use fsm::{FsmError, FsmId, FsmRuntime, StateMachine, StateMachineBuilder, Transition};
