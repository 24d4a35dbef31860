//! Toast texts for linkage updates

use crate::error::MutationError;
use crate::mutator::Ack;
use votrex_types::Notice;

pub trait LinkageNotice {
    fn for_ack(ack: &Ack) -> Notice;
    fn for_mutation_error(err: &MutationError) -> Notice;
}

impl LinkageNotice for Notice {
    fn for_ack(ack: &Ack) -> Notice {
        Notice::success(format!("{} set successfully", ack.target.kind().label()))
    }

    fn for_mutation_error(err: &MutationError) -> Notice {
        Notice::error(format!("Error setting {}", err.target().label()))
    }
}
