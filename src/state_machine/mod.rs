// State machine module for migration batches
//
// A batch moves Idle -> CredentialsChecked -> Running -> Completed, with early
// exits straight to Completed when the gate or selection phase ends it.

pub mod batch_state_machine;
pub mod events;
pub mod states;

pub use batch_state_machine::{BatchStateMachine, StateTransition, StateTransitionError};
pub use events::BatchEvent;
pub use states::BatchState;
