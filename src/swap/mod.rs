//! Agent-planned token swaps for buy signals.
//!
//! Flow: [`amount`] collects and validates the input amount, [`planner`]
//! asks the planning agent for an ordered list of on-chain steps,
//! [`executor`] signs those steps one at a time and waits for confirmation,
//! and [`coordinator`] holds the single swap slot that ties them together.

pub mod amount;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod planner;

pub use amount::{parse_amount, AmountCollector, ConfirmedAmount, EntryBlocked, EntryPolicy};
pub use coordinator::{SwapCoordinator, SwapState};
pub use error::{AmountError, PlannerFailure, SigningFailure, SwapError};
pub use executor::{ActiveSwap, ConfirmationOutcome, StepExecutor, StepOutcome};
pub use planner::{interpret_plan_response, InstructionTemplate, PlanRequester, RelayRequest, SwapPlanner};
