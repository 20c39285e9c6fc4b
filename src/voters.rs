use std::collections::HashMap;

/// Electoral roll, keyed by voter ID, recording whether each voter has cast their vote.
#[derive(Debug, Clone, Default)]
pub struct Voters(HashMap<String, bool>);

impl Voters {
    /// Creates an empty roll.
    pub fn new() -> Self {
        Voters(HashMap::new())
    }

    /// Adds a voter who has not yet voted. Re-adding an existing voter makes them eligible again.
    pub fn add(&mut self, id : &str) {
        self.insert(id, false);
    }

    /// Adds a voter with a known has-voted flag, as read back from storage.
    pub fn insert(&mut self, id : &str, has_voted : bool) {
        self.0.insert(id.to_owned(), has_voted);
    }

    /// Removes a voter from the roll, returning whether they existed.
    pub fn remove(&mut self, id : &str) -> bool {
        self.0.remove(id).is_some()
    }

    /// A voter is eligible if they are on the roll and have not voted yet.
    pub fn is_eligible(&self, id : &str) -> bool {
        matches!(self.0.get(id), Some(false))
    }

    /// Gets the has-voted flag of a voter, or `None` if they are not on the roll.
    pub fn has_voted(&self, id : &str) -> Option<bool> {
        self.0.get(id).copied()
    }

    /// Marks an eligible voter as having voted. Returns false, changing nothing, if the voter is
    /// unknown or has already voted.
    pub fn mark_voted(&mut self, id : &str) -> bool {
        match self.0.get_mut(id) {
            Some(has_voted) if !*has_voted => {
                *has_voted = true;
                true
            },
            _ => false,
        }
    }

    /// Iterates over each voter and their has-voted flag, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.0.iter().map(|(id, has_voted)| (id.as_str(), *has_voted))
    }

    /// Number of voters on the roll who have voted.
    pub fn turnout(&self) -> usize {
        self.0.values().filter(|has_voted| **has_voted).count()
    }

    /// Returns the number of voters on the roll.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
