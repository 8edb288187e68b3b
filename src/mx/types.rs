#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Exchange host names in the order the resolver returned them.
pub fn exchange_hosts(records: &[MxRecord]) -> Vec<String> {
    records.iter().map(|r| r.exchange.clone()).collect()
}
