//! Writes synthetic `LME_*.csv` price series for trying out the dashboard.
//!
//! Dates are day-first, headers use mixed case, and roughly one price in two
//! hundred is `N/A` so the missing-value handling is visible.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use clap::Parser;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Generate sample LME price files
#[derive(Parser, Debug)]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// First trading day, YYYY-MM-DD
    #[arg(long, default_value = "2019-01-01")]
    start: NaiveDate,
    /// Number of calendar days to cover
    #[arg(long, default_value_t = 6 * 365)]
    days: u64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// (file, starting price, daily volatility)
const SERIES: [(&str, f64, f64); 3] = [
    ("LME_Copper.csv", 6000.0, 0.012),
    ("LME_Aluminium.csv", 1900.0, 0.010),
    ("LME_Iron.csv", 75.0, 0.018),
];

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    for (file, start_price, volatility) in SERIES {
        let path = args.out_dir.join(file);
        let mut writer =
            csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(["Date", "Price", "Unit"])?;

        let mut price = start_price;
        let mut rows = 0usize;
        for offset in 0..args.days {
            let date = args.start + Days::new(offset);
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            price = (price * (1.0 + rng.gauss(0.0002, volatility))).max(1.0);

            let cell = if rng.next_f64() < 0.005 {
                "N/A".to_string()
            } else {
                format!("{price:.2}")
            };
            writer.write_record([date.format("%d/%m/%Y").to_string(), cell, "USD/t".to_string()])?;
            rows += 1;
        }
        writer.flush()?;
        println!("Wrote {rows} rows to {}", path.display());
    }

    Ok(())
}
