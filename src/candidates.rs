use std::collections::HashMap;

/// Collection of candidates on the ballot, keyed by name, with the number of votes each has
/// received this session.
#[derive(Debug, Clone, Default)]
pub struct Candidates(HashMap<String, u32>);

impl Candidates {
    /// Creates an empty collection of candidates.
    pub fn new() -> Self {
        Candidates(HashMap::new())
    }

    /// Adds a candidate with no votes. Adding a name which already exists resets its tally.
    pub fn add(&mut self, name : &str) {
        self.0.insert(name.to_owned(), 0);
    }

    /// Removes a candidate and its tally, returning whether it existed.
    pub fn remove(&mut self, name : &str) -> bool {
        self.0.remove(name).is_some()
    }

    /// Whether a candidate with the given name is on the ballot.
    pub fn contains(&self, name : &str) -> bool {
        self.0.contains_key(name)
    }

    /// Adds one vote to the candidate's tally, returning false if there is no such candidate.
    pub fn record_vote(&mut self, name : &str) -> bool {
        match self.0.get_mut(name) {
            Some(votes) => {
                *votes += 1;
                true
            },
            None => false,
        }
    }

    /// Gets the number of votes a candidate has received.
    pub fn votes(&self, name : &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    /// Iterates over candidate names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over each candidate and their tally, in no particular order.
    pub fn tallies(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.0.iter().map(|(name, votes)| (name.as_str(), *votes))
    }

    /// Sum of every candidate's tally.
    pub fn total_votes(&self) -> u32 {
        self.0.values().sum()
    }

    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
