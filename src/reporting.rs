use colored::*;

use crate::election::Flush;
use crate::error::{ConfigError, ElectionError, StorageError};

/// Displays every candidate's tally, sorted by name.
pub fn results<'a>(results : impl Iterator<Item = (&'a str, u32)>) {
    let mut results : Vec<_> = results.collect();
    results.sort();

    println!("{}", "Election Results:".bright_yellow().bold());
    for (candidate, votes) in results {
        println!("    {} : {}", candidate, votes);
    }
}

/// Displays the candidates on the ballot, sorted by name.
pub fn candidates<'a>(candidates : impl Iterator<Item = &'a str>) {
    let mut candidates : Vec<_> = candidates.collect();
    candidates.sort_unstable();

    println!("{}", "List of Candidates:".bright_yellow().bold());
    for candidate in candidates {
        println!("    {}", candidate);
    }
}

/// Displays the electoral roll, sorted by voter ID.
pub fn voters<'a>(voters : impl Iterator<Item = (&'a str, bool)>) {
    let mut voters : Vec<_> = voters.collect();
    voters.sort();

    println!("{}", "List of Voters:".bright_yellow().bold());
    for (id, has_voted) in voters {
        let status = if has_voted {
            "Voted".green()
        }
        else {
            "Not Voted".normal()
        };
        println!("    {} : {}", id, status);
    }
}

/// Tells a voter whether they can still vote.
pub fn voter_status(id : &str, has_voted : Option<bool>) {
    match has_voted {
        Some(false) => println!("{} {} may vote", "Eligible:".bright_green(), id),
        Some(true) => println!("{} {} has already voted", "Not Eligible:".yellow(), id),
        None => println!("{} {} is not on the roll", "Not Eligible:".red(), id),
    }
}

/// Displays a one line summary of turnout.
pub fn turnout(total_votes : u32, voted : usize, roll : usize) {
    println!("{} {} votes this session, {} of {} voters have voted", "Turnout:".bright_blue(), total_votes, voted, roll);
}

/// Confirms a successful change to the registries.
pub fn done(message : &str) {
    println!("{}", message.bright_green());
}

/// Warns that a change was made but could not be written to disk.
pub fn flush(flush : &Flush) {
    if let Flush::Failed(error) = flush {
        println!("{} change was not saved: {}", "Warning:".yellow().bold(), error);
    }
}

/// Displays the reason an election operation was refused.
pub fn election_error(error : &ElectionError) {
    println!("{} {}", "Refused:".red().bold(), error);
}

/// Displays an error reading or writing the election files.
pub fn storage_error(error : &StorageError) {
    println!("{} {}", "Storage Error:".red().bold(), error);
}

/// Displays a configuration problem.
pub fn config_error(error : &ConfigError) {
    println!("{} {}", "Configuration Error:".red().bold(), error);
}

/// Notifies the user that the admin login failed.
pub fn invalid_admin() {
    println!("{}", "Invalid Admin ID or Password.".red().bold());
}
