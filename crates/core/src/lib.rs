#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod abi;
pub use abi::{BURN_EVENT_SIGNATURE, burn_calldata, burn_event_topic};

mod block;
pub use block::{Block, BlockParams, Transaction, TransactionInfo, TransactionReceipt};

pub mod assembler;

mod execute;
pub use execute::{ExecutedTransfer, TransferEvent, execute_transfer, synthetic_address, synthetic_word};

mod fork;
pub use fork::{ForkEvent, MAIN_FORK};

pub mod pipeline;
pub use pipeline::{BlockItem, BlockTransform, RandomFill, ScheduledTransfers};

pub mod rules;
pub use rules::{ForkRule, Rule, StepContext, TickRule};

mod state;
pub use state::{ChainState, ChainStateInner};

mod strategy;
pub use strategy::PopulationEngine;

mod facade;
pub use facade::{ChainFacade, DefaultChainFacade};

mod errors;
pub use errors::{ChainError, RuleError, StateError};
