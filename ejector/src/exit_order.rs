use core::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use helper_functions::predicates;
use types::{
    config::Config,
    phase0::primitives::{Epoch, ValidatorIndex},
    staking::{OperatorKey, StakedValidator},
};

/// Protocol validators that may be requested to exit, in the order they should be requested.
///
/// Operators take turns, and the operator with the most exitable validators left goes next.
/// Ties go to the operator whose next validator has the lowest index and then to the lowest
/// operator key. Within an operator, validators with lower indices exit first.
///
/// Exitability is checked for every protocol validator in [`ExitCandidates::new`], as operator
/// turns depend on how many exitable validators each operator has. Only the ordering is lazy:
/// each call to `next` pops one validator, so stopping early leaves the rest unordered.
pub struct ExitCandidates<'validators> {
    queues: BinaryHeap<OperatorQueue<'validators>>,
    remaining: u64,
}

impl<'validators> ExitCandidates<'validators> {
    /// Validators that are active at `epoch`, not slashed, not exiting and not requested to exit
    /// yet, limited to `max_validators_to_exit`.
    #[must_use]
    pub fn new(
        config: &Config,
        staked_validators: &'validators [StakedValidator],
        last_requested_indices: &BTreeMap<OperatorKey, ValidatorIndex>,
        epoch: Epoch,
        max_validators_to_exit: u64,
    ) -> Self {
        let mut by_operator = BTreeMap::<_, Vec<_>>::new();

        for staked in staked_validators {
            let StakedValidator {
                operator,
                validator,
            } = staked;

            let already_requested = last_requested_indices
                .get(operator)
                .is_some_and(|last_requested| validator.index <= *last_requested);

            if !already_requested
                && predicates::is_exitable_validator(config, &validator.validator, epoch)
            {
                by_operator
                    .entry(*operator)
                    .or_default()
                    .push(Reverse(Candidate(staked)));
            }
        }

        let queues = by_operator
            .into_iter()
            .map(|(operator, candidates)| OperatorQueue {
                operator,
                candidates: BinaryHeap::from(candidates),
            })
            .collect();

        Self {
            queues,
            remaining: max_validators_to_exit,
        }
    }
}

impl<'validators> Iterator for ExitCandidates<'validators> {
    type Item = &'validators StakedValidator;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let mut queue = self.queues.pop()?;
        let Reverse(Candidate(staked)) = queue.candidates.pop()?;

        if !queue.candidates.is_empty() {
            self.queues.push(queue);
        }

        self.remaining -= 1;

        Some(staked)
    }
}

#[derive(Clone, Copy)]
struct Candidate<'validators>(&'validators StakedValidator);

impl Candidate<'_> {
    const fn index(self) -> ValidatorIndex {
        self.0.validator.index
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index() == other.index()
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

struct OperatorQueue<'validators> {
    operator: OperatorKey,
    candidates: BinaryHeap<Reverse<Candidate<'validators>>>,
}

impl OperatorQueue<'_> {
    fn priority(&self) -> (usize, Reverse<Option<ValidatorIndex>>, Reverse<OperatorKey>) {
        let next_index = self
            .candidates
            .peek()
            .map(|Reverse(candidate)| candidate.index());

        (
            self.candidates.len(),
            Reverse(next_index),
            Reverse(self.operator),
        )
    }
}

impl PartialEq for OperatorQueue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.priority() == other.priority()
    }
}

impl Eq for OperatorQueue<'_> {}

impl PartialOrd for OperatorQueue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OperatorQueue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}
