mod candidates;
mod config;
mod election;
mod error;
mod reporting;
mod storage;
mod voters;

use std::path;
use std::process;

use clap::{Parser, Subcommand};
use exitcode::ExitCode;
use log::debug;

use config::AdminCredentials;
use election::{ElectionStore, Flush};
use error::ElectionError;
use storage::{FileStorage, Storage};

#[derive(Parser, Debug)]
#[clap(author, version)]
/// Stores the command line arguments.
struct Args {
    /// Directory holding candidates.txt, voters.txt and votes.txt.
    #[clap(long, short, default_value = ".", env = "EVM_DATA_DIR")]
    data_dir : path::PathBuf,

    #[clap(subcommand)]
    command : Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in as the administrator to manage the election. The account is configured through
    /// EVM_ADMIN_ID and EVM_ADMIN_PASSWORD.
    Admin {
        /// Admin ID.
        #[clap(long)]
        id : String,

        /// Admin password.
        #[clap(long)]
        password : String,

        #[clap(subcommand)]
        action : AdminAction,
    },
    /// List the candidates on the ballot.
    Candidates,
    /// Check whether a voter is on the roll and still able to vote.
    Status {
        /// Voter ID issued by the administrator.
        voter_id : String,
    },
    /// Cast your vote.
    Vote {
        /// Voter ID issued by the administrator.
        voter_id : String,

        /// Name of your preferred candidate.
        candidate : String,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Add a candidate, resetting their tally if they already exist.
    AddCandidate { name : String },
    /// Remove a candidate and their tally.
    RemoveCandidate { name : String },
    /// Add a voter, restoring their eligibility if they already exist.
    AddVoter { id : String },
    /// Remove a voter.
    RemoveVoter { id : String },
    /// Display the candidates.
    Candidates,
    /// Display the results.
    Results {
        /// Only show the tally of this candidate.
        #[clap(long)]
        candidate : Option<String>,
    },
    /// Display the voters and whether they have voted.
    Voters,
}

/// Reports the outcome of a change to the election and picks the exit code for it.
fn outcome(result : Result<Flush, ElectionError>, message : &str) -> ExitCode {
    match result {
        Ok(flush) => {
            reporting::done(message);
            reporting::flush(&flush);

            if flush.is_saved() {
                exitcode::OK
            }
            else {
                exitcode::IOERR
            }
        },
        Err(error) => {
            reporting::election_error(&error);
            exitcode::DATAERR
        },
    }
}

/// Carries out an action on behalf of an authenticated administrator.
fn administer<S : Storage>(store : &mut ElectionStore<S>, action : AdminAction) -> ExitCode {
    match action {
        AdminAction::AddCandidate { name } => outcome(store.add_candidate(&name), &format!("Candidate added: {}", name)),
        AdminAction::RemoveCandidate { name } => outcome(store.remove_candidate(&name), &format!("Candidate removed: {}", name)),
        AdminAction::AddVoter { id } => outcome(store.add_voter(&id), &format!("Voter added: {}", id)),
        AdminAction::RemoveVoter { id } => outcome(store.remove_voter(&id), &format!("Voter removed: {}", id)),
        AdminAction::Candidates => {
            reporting::candidates(store.candidates());
            exitcode::OK
        },
        AdminAction::Results { candidate : Some(name) } => match store.votes_for(&name) {
            Some(votes) => {
                reporting::results([(name.as_str(), votes)].into_iter());
                exitcode::OK
            },
            None => {
                reporting::election_error(&ElectionError::CandidateNotFound(name));
                exitcode::DATAERR
            },
        },
        AdminAction::Results { candidate : None } => {
            reporting::results(store.results());
            reporting::turnout(store.total_votes(), store.turnout(), store.voters().count());
            exitcode::OK
        },
        AdminAction::Voters => {
            reporting::voters(store.voters());
            exitcode::OK
        },
    }
}

/// Loads the election from the data directory and runs the requested command against it.
fn run(args : Args) -> ExitCode {
    debug!("using data directory {}", args.data_dir.display());

    let (mut store, errors) = ElectionStore::load(FileStorage::new(&args.data_dir));
    errors.iter().for_each(reporting::storage_error);

    match args.command {
        Command::Admin { id, password, action } => {
            let admin = match AdminCredentials::from_env() {
                Ok(admin) => admin,
                Err(error) => {
                    reporting::config_error(&error);
                    return exitcode::CONFIG;
                },
            };

            if !admin.verify(&id, &password) {
                reporting::invalid_admin();
                return exitcode::NOPERM;
            }

            administer(&mut store, action)
        },
        Command::Candidates => {
            reporting::candidates(store.candidates());
            exitcode::OK
        },
        Command::Status { voter_id } => {
            reporting::voter_status(&voter_id, store.has_voted(&voter_id));
            exitcode::OK
        },
        Command::Vote { voter_id, candidate } => {
            outcome(store.cast_vote(&voter_id, &candidate), &format!("Vote for {} recorded.", candidate))
        },
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    process::exit(run(args));
}
