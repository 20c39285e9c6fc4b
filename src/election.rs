use log::{info, warn};

use crate::candidates::Candidates;
use crate::error::{ElectionError, StorageError};
use crate::storage::Storage;
use crate::voters::Voters;

/// Whether the state left behind by a successful change made it to storage.
#[must_use]
#[derive(Debug)]
pub enum Flush {
    Saved,
    /// The change stands in memory but could not be written out.
    Failed(StorageError),
}

impl Flush {
    pub fn is_saved(&self) -> bool {
        matches!(self, Flush::Saved)
    }
}

/// Names and voter IDs are keyed without surrounding whitespace, which is how they are read back
/// from storage. A key that is blank once trimmed could not be read back at all.
fn new_key(name : &str) -> Result<&str, ElectionError> {
    match name.trim() {
        "" => Err(ElectionError::BlankName),
        key => Ok(key),
    }
}

/// Holds the candidates and the electoral roll, and is the only way to change either. Every
/// change is written back to `storage` as soon as it is made.
#[derive(Debug)]
pub struct ElectionStore<S : Storage> {
    candidates : Candidates,
    voters : Voters,
    storage : S,
}

impl<S : Storage> ElectionStore<S> {
    /// Reads both registries from storage. Anything that cannot be read leaves that registry
    /// empty, and the errors are handed back alongside the store for the caller to report.
    pub fn load(storage : S) -> (ElectionStore<S>, Vec<StorageError>) {
        let mut errors = Vec::new();

        let mut candidates = Candidates::new();
        match storage.load_candidates() {
            Ok(names) => names.iter().for_each(|name| candidates.add(name)),
            Err(error) => {
                warn!("could not load candidates: {}", error);
                errors.push(error);
            },
        }

        let mut voters = Voters::new();
        match storage.load_voters() {
            Ok(roll) => roll.iter().for_each(|(id, has_voted)| voters.insert(id, *has_voted)),
            Err(error) => {
                warn!("could not load voters: {}", error);
                errors.push(error);
            },
        }

        if candidates.is_empty() && voters.is_empty() {
            info!("no existing election found, starting empty");
        }
        else {
            info!("loaded {} candidates and {} voters", candidates.len(), voters.len());
        }

        let store = ElectionStore {
            candidates,
            voters,
            storage,
        };

        (store, errors)
    }

    /// Writes the current state of both registries to storage.
    pub fn save(&mut self) -> Flush {
        match self.storage.save(&self.candidates, &self.voters) {
            Ok(()) => Flush::Saved,
            Err(error) => {
                warn!("could not save election: {}", error);
                Flush::Failed(error)
            },
        }
    }

    /// Puts a candidate on the ballot with no votes. An existing candidate of the same name has
    /// their tally reset.
    pub fn add_candidate(&mut self, name : &str) -> Result<Flush, ElectionError> {
        let name = new_key(name)?;
        if self.candidates.contains(name) {
            warn!("candidate {} re-added, tally reset to 0", name);
        }
        self.candidates.add(name);
        info!("candidate added: {}", name);
        Ok(self.save())
    }

    /// Takes a candidate, and their tally, off the ballot.
    pub fn remove_candidate(&mut self, name : &str) -> Result<Flush, ElectionError> {
        let name = name.trim();
        if !self.candidates.remove(name) {
            return Err(ElectionError::CandidateNotFound(name.to_owned()));
        }
        info!("candidate removed: {}", name);
        Ok(self.save())
    }

    /// Puts a voter on the roll as not having voted. An existing voter of the same ID becomes
    /// eligible to vote again.
    pub fn add_voter(&mut self, id : &str) -> Result<Flush, ElectionError> {
        let id = new_key(id)?;
        if self.voters.has_voted(id) == Some(true) {
            warn!("voter {} re-added after voting, eligibility restored", id);
        }
        self.voters.add(id);
        info!("voter added: {}", id);
        Ok(self.save())
    }

    /// Takes a voter off the roll.
    pub fn remove_voter(&mut self, id : &str) -> Result<Flush, ElectionError> {
        let id = id.trim();
        if !self.voters.remove(id) {
            return Err(ElectionError::VoterNotFound(id.to_owned()));
        }
        info!("voter removed: {}", id);
        Ok(self.save())
    }

    /// A voter may vote if they are on the roll and have not voted yet. There is no other check on
    /// a voter's identity.
    pub fn authenticate_voter(&self, id : &str) -> bool {
        self.voters.is_eligible(id.trim())
    }

    /// Records a single vote for `candidate`, after which `voter` can never vote again. Nothing
    /// changes if the voter is not eligible or the candidate does not exist.
    pub fn cast_vote(&mut self, voter : &str, candidate : &str) -> Result<Flush, ElectionError> {
        let (voter, candidate) = (voter.trim(), candidate.trim());
        if !self.authenticate_voter(voter) {
            return Err(ElectionError::IneligibleVoter(voter.to_owned()));
        }
        if !self.candidates.contains(candidate) {
            return Err(ElectionError::InvalidCandidate(candidate.to_owned()));
        }

        // Both checks have passed so neither of these can fail, and the tally and the flag move
        // together.
        self.candidates.record_vote(candidate);
        self.voters.mark_voted(voter);

        info!("vote recorded for {}", candidate);
        Ok(self.save())
    }

    /// Every candidate and their tally, in no particular order.
    pub fn results(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.candidates.tallies()
    }

    /// Every candidate name, in no particular order.
    pub fn candidates(&self) -> impl Iterator<Item = &str> + '_ {
        self.candidates.names()
    }

    /// Every voter and whether they have voted, in no particular order.
    pub fn voters(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.voters.iter()
    }

    pub fn votes_for(&self, candidate : &str) -> Option<u32> {
        self.candidates.votes(candidate.trim())
    }

    pub fn has_voted(&self, voter : &str) -> Option<bool> {
        self.voters.has_voted(voter.trim())
    }

    /// Total number of votes cast this session.
    pub fn total_votes(&self) -> u32 {
        self.candidates.total_votes()
    }

    /// Number of voters on the roll who have voted, including in earlier sessions.
    pub fn turnout(&self) -> usize {
        self.voters.turnout()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use super::{ElectionStore, Flush};
    use crate::candidates::Candidates;
    use crate::error::{ElectionError, StorageError};
    use crate::storage::{FileStorage, Storage};
    use crate::voters::Voters;

    fn empty_store(dir : &tempfile::TempDir) -> ElectionStore<FileStorage> {
        let (store, errors) = ElectionStore::load(FileStorage::new(dir.path()));
        assert!(errors.is_empty());
        store
    }

    fn saved(result : Result<Flush, ElectionError>) {
        assert!(result.unwrap().is_saved());
    }

    fn results<S : Storage>(store : &ElectionStore<S>) -> HashMap<String, u32> {
        store
        .results()
        .map(|(name, votes)| (name.to_owned(), votes))
        .collect()
    }

    /// Storage which can be read from but never written to.
    struct ReadOnly;

    impl Storage for ReadOnly {
        fn load_candidates(&self) -> Result<Vec<String>, StorageError> {
            Ok(vec![String::from("Alice")])
        }

        fn load_voters(&self) -> Result<Vec<(String, bool)>, StorageError> {
            Ok(vec![(String::from("v1"), false)])
        }

        fn save(&mut self, _ : &Candidates, _ : &Voters) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path : "read-only".into(),
                source : std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only"),
            })
        }
    }

    #[test]
    fn single_voter_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        assert!(store.add_candidate("Alice").unwrap().is_saved());
        assert!(store.add_candidate("Bob").unwrap().is_saved());
        assert!(store.add_voter("v1").unwrap().is_saved());

        assert!(store.cast_vote("v1", "Alice").unwrap().is_saved());

        let expected = HashMap::from([(String::from("Alice"), 1), (String::from("Bob"), 0)]);
        assert_eq!(results(&store), expected);

        assert!(matches!(store.cast_vote("v1", "Bob"), Err(ElectionError::IneligibleVoter(_))));
        assert_eq!(results(&store), expected);
    }

    #[test]
    fn voting_makes_a_voter_permanently_ineligible() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        saved(store.add_candidate("Alice"));
        saved(store.add_voter("v1"));

        assert!(store.authenticate_voter("v1"));
        saved(store.cast_vote("v1", "Alice"));

        for _ in 0..3 {
            assert!(!store.authenticate_voter("v1"));
            assert!(store.cast_vote("v1", "Alice").is_err());
        }
        assert_eq!(store.votes_for("Alice"), Some(1));
        assert_eq!(store.has_voted("v1"), Some(true));
    }

    #[test]
    fn tallies_match_successful_votes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        for candidate in ["Alice", "Bob", "Carol"] {
            saved(store.add_candidate(candidate));
        }

        let choices = ["Alice", "Bob", "Alice", "Dave", "Alice", "Carol", "Bob"];
        let mut expected : HashMap<String, u32> = HashMap::from([
            (String::from("Alice"), 0),
            (String::from("Bob"), 0),
            (String::from("Carol"), 0),
        ]);

        for (i, choice) in choices.iter().enumerate() {
            let voter = format!("v{}", i);
            saved(store.add_voter(&voter));

            if store.cast_vote(&voter, choice).is_ok() {
                *expected.get_mut(*choice).unwrap() += 1;
            }
            // A second attempt never counts.
            assert!(store.cast_vote(&voter, choice).is_err());
        }

        assert_eq!(results(&store), expected);
        assert_eq!(store.total_votes(), 6);
        assert_eq!(store.turnout(), 6);
    }

    #[test]
    fn failed_votes_change_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        saved(store.add_candidate("Alice"));
        saved(store.add_voter("v1"));

        assert!(matches!(store.cast_vote("unknown", "Alice"), Err(ElectionError::IneligibleVoter(_))));
        assert!(matches!(store.cast_vote("v1", "Zed"), Err(ElectionError::InvalidCandidate(_))));

        assert_eq!(store.votes_for("Alice"), Some(0));
        assert_eq!(store.has_voted("v1"), Some(false));
        assert_eq!(store.has_voted("unknown"), None);
        assert!(store.authenticate_voter("v1"));
    }

    #[test]
    fn unknown_voter_is_reported_before_unknown_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);

        assert!(matches!(store.cast_vote("ghost", "nobody"), Err(ElectionError::IneligibleVoter(_))));
    }

    #[test]
    fn removing_missing_entries_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        saved(store.add_candidate("Alice"));
        saved(store.add_voter("v1"));

        assert!(matches!(store.remove_candidate("Carol"), Err(ElectionError::CandidateNotFound(_))));
        assert!(matches!(store.remove_voter("v2"), Err(ElectionError::VoterNotFound(_))));

        assert_eq!(store.candidates().collect::<Vec<_>>(), vec!["Alice"]);
        assert_eq!(store.voters().collect::<Vec<_>>(), vec![("v1", false)]);
    }

    #[test]
    fn removing_a_candidate_clears_their_tally() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        saved(store.add_candidate("Alice"));
        saved(store.add_voter("v1"));
        saved(store.cast_vote("v1", "Alice"));

        saved(store.remove_candidate("Alice"));
        saved(store.add_candidate("Alice"));

        assert_eq!(store.votes_for("Alice"), Some(0));
    }

    #[test]
    fn re_adding_resets_tally_and_eligibility() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        saved(store.add_candidate("Alice"));
        saved(store.add_voter("v1"));
        saved(store.cast_vote("v1", "Alice"));

        saved(store.add_candidate("Alice"));
        assert_eq!(store.votes_for("Alice"), Some(0));

        saved(store.add_voter("v1"));
        assert_eq!(store.has_voted("v1"), Some(false));
        assert!(store.authenticate_voter("v1"));
    }

    #[test]
    fn reload_restores_names_and_flags_but_not_tallies() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = empty_store(&dir);
            saved(store.add_candidate("Alice"));
            saved(store.add_candidate("Bob"));
            saved(store.add_voter("v1"));
            saved(store.add_voter("v2"));
            saved(store.cast_vote("v1", "Bob"));
        }

        let store = empty_store(&dir);

        let mut candidates : Vec<_> = store.candidates().collect();
        candidates.sort();
        assert_eq!(candidates, vec!["Alice", "Bob"]);

        let mut voters : Vec<_> = store.voters().collect();
        voters.sort();
        assert_eq!(voters, vec![("v1", true), ("v2", false)]);

        assert_eq!(store.votes_for("Bob"), Some(0));
        assert!(!store.authenticate_voter("v1"));
    }

    #[test]
    fn every_mutation_is_written_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = empty_store(&dir);
        let storage = FileStorage::new(dir.path());

        saved(store.add_candidate("Alice"));
        assert_eq!(storage.load_candidates().unwrap(), vec!["Alice"]);

        saved(store.add_voter("v1"));
        saved(store.cast_vote("v1", "Alice"));
        assert_eq!(storage.load_voters().unwrap(), vec![(String::from("v1"), true)]);
        assert_eq!(fs::read_to_string(storage.votes_path()).unwrap(), "Alice,1\n");

        saved(store.remove_voter("v1"));
        assert!(storage.load_voters().unwrap().is_empty());
    }

    #[test]
    fn padded_and_blank_names_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = empty_store(&dir);
            assert!(matches!(store.add_candidate(""), Err(ElectionError::BlankName)));
            assert!(matches!(store.add_voter("   "), Err(ElectionError::BlankName)));
            saved(store.add_candidate(" Alice "));
            saved(store.add_candidate("Smith, John"));
            saved(store.add_voter(" v1"));
            saved(store.cast_vote("v1 ", "Alice"));

            assert_eq!(store.votes_for("Alice"), Some(1));
            assert_eq!(store.has_voted("v1"), Some(true));
        }

        let store = empty_store(&dir);

        let mut candidates : Vec<_> = store.candidates().collect();
        candidates.sort();
        assert_eq!(candidates, vec!["Alice", "Smith, John"]);
        assert_eq!(store.voters().collect::<Vec<_>>(), vec![("v1", true)]);
    }

    #[test]
    fn undecodable_voter_line_does_not_reopen_voting() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::write(storage.candidates_path(), "Alice\n").unwrap();
        fs::write(storage.voters_path(), b"v1,true\n\xff\xfe,false\nv2,false\n").unwrap();

        let (mut store, errors) = ElectionStore::load(storage);
        assert!(errors.is_empty());

        saved(store.add_candidate("Bob"));
        assert!(matches!(store.cast_vote("v1", "Alice"), Err(ElectionError::IneligibleVoter(_))));

        let (reloaded, _) = ElectionStore::load(FileStorage::new(dir.path()));
        assert_eq!(reloaded.has_voted("v1"), Some(true));
        assert_eq!(reloaded.has_voted("v2"), Some(false));
    }

    #[test]
    fn failed_flush_keeps_in_memory_change() {
        let (mut store, errors) = ElectionStore::load(ReadOnly);
        assert!(errors.is_empty());

        match store.cast_vote("v1", "Alice") {
            Ok(Flush::Failed(StorageError::Io { .. })) => (),
            other => panic!("expected a failed flush, got {:?}", other),
        }

        assert_eq!(store.votes_for("Alice"), Some(1));
        assert!(!store.authenticate_voter("v1"));
        assert!(!store.save().is_saved());
    }

    #[test]
    fn unreadable_storage_starts_empty_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        // A directory where the file should be cannot be read as one.
        fs::create_dir(storage.voters_path()).unwrap();
        fs::write(storage.candidates_path(), "Alice\n").unwrap();

        let (store, errors) = ElectionStore::load(storage);

        assert_eq!(errors.len(), 1);
        assert_eq!(store.candidates().collect::<Vec<_>>(), vec!["Alice"]);
        assert_eq!(store.voters().count(), 0);
    }
}
