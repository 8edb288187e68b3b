use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use mailcheck_bulk::{BulkOptions, ProbeOptions};

#[derive(Parser)]
#[command(
    name = "mailcheck-bulk",
    version,
    about = "Vérifie en masse des adresses e-mail (syntaxe, MX, jetables, catch-all, SMTP)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// fichier d'entrée (une adresse par ligne)
    #[arg(long, global = true, default_value = "emails.txt")]
    pub input: PathBuf,

    /// store CSV des résultats (append-only, reprise automatique)
    #[arg(long, global = true, default_value = "emails_validated.csv")]
    pub output: PathBuf,

    /// répertoire des listes consolidées
    #[arg(long = "data-dir", global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// nombre de workers en parallèle
    #[arg(long, global = true, default_value_t = mailcheck_bulk::bulk::DEFAULT_WORKERS)]
    pub workers: usize,

    /// taille des lots écrits dans le store
    #[arg(long = "batch-size", global = true, default_value_t = mailcheck_bulk::bulk::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// nom utilisé pour EHLO
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// timeout SMTP par hôte:port (secondes)
    #[arg(long = "timeout", global = true, default_value_t = 10)]
    pub timeout_secs: u64,

    /// nombre de balayages complets hôtes x ports
    #[arg(long, global = true, default_value_t = 1)]
    pub sweeps: u32,

    /// pause entre deux balayages (secondes)
    #[arg(long = "sweep-delay", global = true, default_value_t = 2)]
    pub sweep_delay_secs: u64,

    /// vérifie le certificat TLS après STARTTLS (désactivé par défaut)
    #[arg(long = "verify-tls", global = true)]
    pub verify_tls: bool,

    /// format des statistiques: human|json
    #[arg(long, global = true, default_value = "human")]
    pub format: String,

    /// désactive la barre de progression
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// valide les nouvelles adresses du fichier d'entrée (défaut)
    Run,
    /// normalise, dédoublonne et trie une liste d'adresses
    Clean {
        /// liste brute
        #[arg(value_name = "INPUT")]
        source: PathBuf,
        /// liste nettoyée
        #[arg(value_name = "OUTPUT")]
        dest: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn bulk_options(&self) -> Result<BulkOptions> {
        if self.workers == 0 {
            bail!("--workers must be at least 1");
        }
        Ok(BulkOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            data_dir: self.data_dir.clone(),
            workers: self.workers,
            batch_size: self.batch_size.max(1),
        })
    }

    pub fn probe_options(&self) -> ProbeOptions {
        let mut options = ProbeOptions::default();
        if let Some(helo) = self.helo.as_deref().filter(|h| !h.trim().is_empty()) {
            options.helo_host = helo.to_string();
        }
        options.timeout = Duration::from_secs(self.timeout_secs.max(1));
        options.sweeps = self.sweeps.max(1);
        options.sweep_delay = Duration::from_secs(self.sweep_delay_secs);
        options.verify_tls = self.verify_tls;
        options
    }
}
