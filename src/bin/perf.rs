use log::{debug, info, LevelFilter};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use structopt::StructOpt;

use std::{collections::BTreeMap, time};

use rbmap::TreeMap;

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed")]
    seed: Option<u64>,

    #[structopt(long = "loads", default_value = "1000000")] // default 1M
    loads: usize,

    #[structopt(long = "sets", default_value = "0")]
    sets: usize,

    #[structopt(long = "dels", default_value = "0")]
    dels: usize,

    #[structopt(long = "gets", default_value = "0")]
    gets: usize,

    #[structopt(long = "iters", default_value = "1")]
    iters: usize,

    #[structopt(long = "btree")] // run the same load on std BTreeMap
    btree: bool,

    #[structopt(long = "validate")]
    validate: bool,

    #[structopt(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

fn main() {
    let opts = Opt::from_args();
    TermLogger::init(
        opts.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    let seed = opts.seed.unwrap_or_else(random);
    info!("perf seed:{}", seed);

    let mut index: TreeMap<u64, u64> = TreeMap::new();
    do_tmap(seed, &opts, &mut index);

    if opts.validate {
        let start = time::Instant::now();
        match index.validate() {
            Ok(()) => info!("validated {} entries, took {:?}", index.len(), start.elapsed()),
            Err(err) => panic!("validate failed {}", err),
        }
        debug!("black_height {}", index.black_height());
    }

    if opts.btree {
        do_btree(seed, &opts);
    }
}

fn do_tmap(seed: u64, opts: &Opt, index: &mut TreeMap<u64, u64>) {
    let mut rng = SmallRng::seed_from_u64(seed);

    // initial load
    let start = time::Instant::now();
    for _i in 0..opts.loads {
        let (key, val): (u64, u64) = (rng.gen(), rng.gen());
        index.set(key, val);
    }
    info!("tmap loaded {} items in {:?}", index.len(), start.elapsed());

    let start = time::Instant::now();
    let total = opts.sets + opts.dels + opts.gets;
    let (mut n_miss, mut n) = (0, total);
    while n > 0 {
        let op = rng.gen::<usize>() % total;
        let key = rng.gen::<u64>();
        if op < opts.sets {
            index.set(key, rng.gen::<u64>());
        } else if op < (opts.sets + opts.dels) {
            n_miss += index.remove(&key).map(|_| 0).unwrap_or(1);
        } else {
            n_miss += index.get(&key).map(|_| 0).unwrap_or(1);
        }
        n -= 1;
    }
    if total > 0 {
        info!(
            "tmap incremental for operations {}, misses {}, took {:?}",
            total,
            n_miss,
            start.elapsed()
        );
    }

    for i in 0..opts.iters {
        let start = time::Instant::now();
        let n = match i % 2 {
            0 => index.iter().count(),
            _ => index.iter().rev().count(),
        };
        info!("tmap iter-{} for iterating {}, took {:?}", i, n, start.elapsed());
    }
}

fn do_btree(seed: u64, opts: &Opt) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut index: BTreeMap<u64, u64> = BTreeMap::new();

    let start = time::Instant::now();
    for _i in 0..opts.loads {
        let (key, val): (u64, u64) = (rng.gen(), rng.gen());
        index.insert(key, val);
    }
    info!("btree loaded {} items in {:?}", index.len(), start.elapsed());

    let start = time::Instant::now();
    let total = opts.sets + opts.dels + opts.gets;
    let (mut n_miss, mut n) = (0, total);
    while n > 0 {
        let op = rng.gen::<usize>() % total;
        let key = rng.gen::<u64>();
        if op < opts.sets {
            index.insert(key, rng.gen::<u64>());
        } else if op < (opts.sets + opts.dels) {
            n_miss += index.remove(&key).map(|_| 0).unwrap_or(1);
        } else {
            n_miss += index.get(&key).map(|_| 0).unwrap_or(1);
        }
        n -= 1;
    }
    if total > 0 {
        info!(
            "btree incremental for operations {}, misses {}, took {:?}",
            total,
            n_miss,
            start.elapsed()
        );
    }

    for i in 0..opts.iters {
        let start = time::Instant::now();
        let n = index.iter().count();
        info!("btree iter-{} for iterating {}, took {:?}", i, n, start.elapsed());
    }
}
