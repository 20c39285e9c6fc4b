use std::fs;
use std::io;
use std::path;

use log::{debug, info, warn};

use crate::candidates::Candidates;
use crate::error::StorageError;
use crate::voters::Voters;

/// File holding one candidate name per line.
pub const CANDIDATES_FILE : &str = "candidates.txt";
/// File holding one `id,has_voted` pair per line.
pub const VOTERS_FILE : &str = "voters.txt";
/// File holding one `name,votes` pair per line. Only ever written.
pub const VOTES_FILE : &str = "votes.txt";

/// Somewhere the election can be read from at startup and written back to after each change.
/// Missing data is not an error: it loads as an empty list.
pub trait Storage {
    /// Reads the names of all candidates.
    fn load_candidates(&self) -> Result<Vec<String>, StorageError>;

    /// Reads every voter ID along with its has-voted flag.
    fn load_voters(&self) -> Result<Vec<(String, bool)>, StorageError>;

    /// Writes the full state of both registries.
    fn save(&mut self, candidates : &Candidates, voters : &Voters) -> Result<(), StorageError>;
}

/// Stores the election as three comma separated text files inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir : path::PathBuf,
}

impl FileStorage {
    /// Creates storage rooted at `dir`. Nothing is touched on disk until the first save.
    pub fn new(dir : impl Into<path::PathBuf>) -> Self {
        FileStorage {
            dir : dir.into(),
        }
    }

    pub fn candidates_path(&self) -> path::PathBuf {
        self.dir.join(CANDIDATES_FILE)
    }

    pub fn voters_path(&self) -> path::PathBuf {
        self.dir.join(VOTERS_FILE)
    }

    pub fn votes_path(&self) -> path::PathBuf {
        self.dir.join(VOTES_FILE)
    }

    /// Opens a reader over the file at `path`, or `None` if the file does not exist yet.
    fn reader(path : &path::Path, trim : csv::Trim) -> Result<Option<csv::Reader<fs::File>>, StorageError> {
        match fs::File::open(path) {
            Ok(file) => {
                let reader =
                    csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .trim(trim)
                    .from_reader(file);

                Ok(Some(reader))
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, starting empty", path.display());
                Ok(None)
            },
            Err(source) => Err(StorageError::Io { path : path.to_owned(), source }),
        }
    }

    /// Writes every record produced by `records` to the file at `path`, replacing its contents.
    fn write<I, R>(path : &path::Path, records : I) -> Result<(), StorageError>
    where
        I : IntoIterator<Item = R>,
        R : IntoIterator,
        R::Item : AsRef<[u8]>,
    {
        let csv_error = |source| StorageError::Csv { path : path.to_owned(), source };

        let mut writer =
            csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;

        for record in records {
            writer.write_record(record).map_err(csv_error)?;
        }

        writer
        .flush()
        .map_err(|source| StorageError::Io { path : path.to_owned(), source })?;

        debug!("wrote {}", path.display());
        Ok(())
    }

    /// Pulls the next record out of `records`, skipping any that cannot be parsed. Only a failure
    /// to read the file itself is returned as an error.
    fn next_record<R : io::Read>(
        path : &path::Path,
        records : &mut csv::ByteRecordsIter<'_, R>,
    ) -> Option<Result<Vec<String>, StorageError>> {
        loop {
            match records.next()? {
                Ok(record) => {
                    // Bytes which are not valid UTF-8 are replaced rather than losing the line.
                    let fields =
                        record
                        .iter()
                        .map(|field| String::from_utf8_lossy(field).into_owned())
                        .collect();

                    return Some(Ok(fields));
                },
                Err(error) if matches!(error.kind(), csv::ErrorKind::Io(_)) => {
                    return Some(Err(StorageError::Csv { path : path.to_owned(), source : error }));
                },
                Err(error) => {
                    let line = error.position().map(|p| p.line()).unwrap_or_default();
                    warn!("skipping unreadable record in {} (line: {}): {}", path.display(), line, error);
                },
            }
        }
    }
}

impl Storage for FileStorage {
    fn load_candidates(&self) -> Result<Vec<String>, StorageError> {
        let path = self.candidates_path();
        let mut reader = match FileStorage::reader(&path, csv::Trim::None)? {
            Some(reader) => reader,
            None => return Ok(Vec::new()),
        };

        let mut candidates = Vec::new();
        let mut records = reader.byte_records();
        while let Some(fields) = FileStorage::next_record(&path, &mut records) {
            // A name containing an unquoted comma comes back split into several fields, so put the
            // line back together as it was written.
            let line = fields?.join(",");
            let name = line.trim();

            if !name.is_empty() {
                candidates.push(name.to_owned());
            }
        }

        Ok(candidates)
    }

    fn load_voters(&self) -> Result<Vec<(String, bool)>, StorageError> {
        let path = self.voters_path();
        let mut reader = match FileStorage::reader(&path, csv::Trim::All)? {
            Some(reader) => reader,
            None => return Ok(Vec::new()),
        };

        let mut voters = Vec::new();
        let mut records = reader.byte_records();
        let mut line = 0;
        while let Some(fields) = FileStorage::next_record(&path, &mut records) {
            line += 1;
            match fields?.as_slice() {
                [id, flag] if !id.is_empty() => voters.push((id.to_owned(), flag.eq_ignore_ascii_case("true"))),
                _ => warn!("skipping malformed voter record in {} (record: {})", path.display(), line),
            }
        }

        Ok(voters)
    }

    fn save(&mut self, candidates : &Candidates, voters : &Voters) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
        .map_err(|source| StorageError::Io { path : self.dir.clone(), source })?;

        // Every file is attempted even if an earlier one fails, so that as much as possible
        // reaches disk. The first failure is the one reported.
        let results = [
            FileStorage::write(
                &self.candidates_path(),
                candidates.names().map(|name| [name]),
            ),
            FileStorage::write(
                &self.voters_path(),
                voters.iter().map(|(id, has_voted)| [id.to_owned(), has_voted.to_string()]),
            ),
            FileStorage::write(
                &self.votes_path(),
                candidates.tallies().map(|(name, votes)| [name.to_owned(), votes.to_string()]),
            ),
        ];

        results.into_iter().collect()
    }
}
