use alloy_primitives::U256;

/// Fee-market parameters as reported by the node. Either may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeParameters {
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Cost inputs for one candidate submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeEstimate {
    pub gas_units: U256,
    pub max_fee_per_gas: U256,
    pub priority_fee_per_gas: U256,
    /// Base fee of the most recent block.
    pub base_fee_per_gas: U256,
}

impl FeeEstimate {
    /// `min(base + priority, max)`.
    pub fn effective_gas_price(&self) -> U256 {
        self.base_fee_per_gas
            .saturating_add(self.priority_fee_per_gas)
            .min(self.max_fee_per_gas)
    }

    /// `gas_units * effective_gas_price`, `None` on overflow.
    pub fn total_cost(&self) -> Option<U256> {
        self.gas_units.checked_mul(self.effective_gas_price())
    }
}
