use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vote-ledger",
    about = "Vote ledger: per-user votes and per-votable tallies backed by PostgreSQL",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Apply the embedded database migrations
    Migrate,

    /// Cast a vote and print the score delta as JSON
    Cast {
        /// Authenticated user id (omit to cast anonymously)
        #[arg(long)]
        user: Option<i64>,

        /// Votable kind: submission or comment
        #[arg(long)]
        what: String,

        /// Votable id
        #[arg(long = "what-id")]
        what_id: String,

        /// Requested vote value: 1 or -1
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },

    /// Print a user's votes in a thread as JSON
    ThreadVotes {
        /// Authenticated user id (omit for an anonymous reader)
        #[arg(long)]
        user: Option<i64>,

        /// Submission id of the thread
        #[arg(long)]
        submission: i64,
    },

    /// Fill the database with random submissions and comment trees
    Seed {
        /// Number of submissions to create
        #[arg(long, default_value_t = 10)]
        threads: usize,

        /// Number of root comments per submission
        #[arg(long, default_value_t = 10)]
        comments: usize,

        /// Seed for the random generator, for reproducible data
        #[arg(long)]
        seed: Option<u64>,
    },
}
