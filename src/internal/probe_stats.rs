#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pedantic)]
#![allow(clippy::print_stdout)]

use plotters::prelude::*;
use probing::{ProbingTable, next_prime};
use rand::Rng;

// Requested table size; rounded up to a prime by the table
const TABLE_SIZE: usize = 100_000;
// Load factors from 0.05 to 0.5, the growth threshold
const NUM_LOAD_FACTORS: usize = 10;

// Measured scenarios
const SCENARIOS: [&str; 3] = ["Successful lookup", "Unsuccessful lookup", "Lookup after churn"];

struct Sample {
    average: f64,
    worst: usize,
}

fn measure(table: &ProbingTable<u64, u64>, keys: &[u64]) -> Sample {
    let lengths: Vec<usize> = keys.iter().map(|key| table.probe_length(key)).collect();
    let total: usize = lengths.iter().sum();

    Sample {
        average: total as f64 / lengths.len().max(1) as f64,
        worst: lengths.iter().copied().max().unwrap_or(0),
    }
}

// Runs every scenario for `n_keys` entries. Even keys are stored, odd keys are
// guaranteed misses.
fn run<R: Rng>(rng: &mut R, n_keys: usize) -> [Sample; 3] {
    let mut table = ProbingTable::new(TABLE_SIZE);
    let mut stored = Vec::with_capacity(n_keys);
    while stored.len() < n_keys {
        let key = rng.random_range(0..u64::MAX / 2) * 2;
        if !table.contains(&key) {
            table.insert(key, key);
            stored.push(key);
        }
    }
    let misses: Vec<u64> = stored.iter().map(|key| key + 1).collect();

    let hit = measure(&table, &stored);
    let miss = measure(&table, &misses);

    // Replace half of the entries so tombstones sit on the probe paths
    let (evicted, kept) = stored.split_at(n_keys / 2);
    let mut churned = kept.to_vec();
    for key in evicted {
        table.remove(key);
    }
    while churned.len() < n_keys {
        let key = rng.random_range(0..u64::MAX / 2) * 2;
        if !table.contains(&key) {
            table.insert(key, key);
            churned.push(key);
        }
    }
    log::info!("{n_keys} keys: {} tombstones after churn", table.tombstones());

    let churn = measure(&table, &churned);

    [hit, miss, churn]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let capacity = next_prime(TABLE_SIZE);
    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.05 + (0.5 - 0.05) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();
    // Stay at or below half of the slots so the table never grows mid-run
    let num_keys: Vec<usize> = load_factors
        .iter()
        .map(|&load| ((capacity as f64 * load) as usize).min(capacity / 2))
        .collect();

    println!("Load factors: {:?}", load_factors);
    println!("Number of keys: {:?}", num_keys);

    let mut average_probes: Vec<Vec<f64>> = vec![Vec::new(); SCENARIOS.len()];
    let mut worst_probes: Vec<Vec<usize>> = vec![Vec::new(); SCENARIOS.len()];

    let mut rng = rand::rng();
    for &n_keys in &num_keys {
        println!("Testing with {} keys", n_keys);

        for (scenario_idx, sample) in run(&mut rng, n_keys).into_iter().enumerate() {
            println!(
                "  {}: Avg probes = {:.2}, Worst = {}",
                SCENARIOS[scenario_idx], sample.average, sample.worst
            );
            average_probes[scenario_idx].push(sample.average);
            worst_probes[scenario_idx].push(sample.worst);
        }
    }

    let worst_as_f64: Vec<Vec<f64>> =
        worst_probes.iter().map(|v| v.iter().map(|&x| x as f64).collect()).collect();

    draw_chart(
        "average_probe_length.png",
        "Average Probe Length by Load Factor",
        "Average Probes",
        &load_factors,
        &average_probes,
    )?;
    draw_chart(
        "worst_probe_length.png",
        "Worst-Case Probe Length by Load Factor",
        "Worst-Case Probes",
        &load_factors,
        &worst_as_f64,
    )?;

    println!("Generated plot images: average_probe_length.png, worst_probe_length.png");

    Ok(())
}

fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    load_factors: &[f64],
    series: &[Vec<f64>],
) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let colors = [
        RGBColor(220, 50, 50), // Bright red
        RGBColor(50, 90, 220), // Bright blue
        RGBColor(50, 180, 50), // Bright green
    ];

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y: f64 = series.iter().flat_map(|v| v.iter()).fold(0.0, |max, &x| if x > max { x } else { max }) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..0.55, 0.0..max_y.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Load Factor")
        .y_desc(y_desc)
        .axis_desc_style((font_family, 16))
        .draw()?;

    for (scenario_idx, &scenario) in SCENARIOS.iter().enumerate() {
        let color = &colors[scenario_idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(2);
        let points: Vec<(f64, f64)> =
            load_factors.iter().copied().zip(series[scenario_idx].iter().copied()).collect();

        chart
            .draw_series(LineSeries::new(points.clone(), line_style))?
            .label(scenario)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(points.into_iter().map(|point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;

    Ok(())
}
