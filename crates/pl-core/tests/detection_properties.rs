//! Property tests for episode detection invariants.

use chrono::{Duration, NaiveDate};
use pl_common::PanelRow;
use pl_core::detect::detect_episodes;
use pl_core::Panel;
use proptest::prelude::*;

fn start_date() -> NaiveDate {
    "2020-01-01".parse().unwrap()
}

fn panel_from(discounts: &[Option<f64>]) -> Panel {
    let start = start_date();
    let mut rows: Vec<PanelRow> = discounts
        .iter()
        .enumerate()
        .map(|(i, pct)| PanelRow {
            product_id: 1,
            date: start + Duration::days(i as i64),
            engagement: Some(100.0),
            discount_pct: *pct,
        })
        .collect();
    // Anchor row so the discount signal is never all-null.
    rows.push(PanelRow {
        product_id: 1,
        date: start + Duration::days(discounts.len() as i64),
        engagement: Some(100.0),
        discount_pct: Some(0.0),
    });
    Panel::from_rows(rows).unwrap()
}

proptest! {
    #[test]
    fn episodes_are_ordered_disjoint_and_cover_discount_days(
        discounts in prop::collection::vec(prop::option::of(0.0f64..90.0), 1..150),
    ) {
        let panel = panel_from(&discounts);
        let series = panel.product(1).unwrap();
        let episodes = detect_episodes(series);

        for ep in &episodes {
            prop_assert!(ep.start_date <= ep.end_date);
            prop_assert_eq!(
                i64::from(ep.duration_days),
                (ep.end_date - ep.start_date).num_days() + 1
            );
            prop_assert!(ep.duration_days >= 1);
            prop_assert_eq!(&ep.episode_id, &format!("1_{}", ep.start_date));
            prop_assert!(ep.max_discount_pct > 0.0);
        }

        // Strictly ordered with a real gap between consecutive episodes.
        for pair in episodes.windows(2) {
            prop_assert!((pair[1].start_date - pair[0].end_date).num_days() > 1);
        }

        // Every discount day lands in exactly one episode, and episode
        // boundaries are discount days themselves.
        let covering = |date: NaiveDate| {
            episodes
                .iter()
                .filter(|ep| date >= ep.start_date && date <= ep.end_date)
                .count()
        };
        for &(date, _) in series.discount_days() {
            prop_assert_eq!(covering(date), 1);
        }
        for ep in &episodes {
            prop_assert!(series.discount_days().iter().any(|&(d, _)| d == ep.start_date));
            prop_assert!(series.discount_days().iter().any(|&(d, _)| d == ep.end_date));
        }
    }

    #[test]
    fn detection_is_deterministic(
        discounts in prop::collection::vec(prop::option::of(0.0f64..90.0), 1..100),
    ) {
        let panel = panel_from(&discounts);
        let series = panel.product(1).unwrap();
        prop_assert_eq!(detect_episodes(series), detect_episodes(series));
    }
}
