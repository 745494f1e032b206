use crate::core::models::patient::Patient;
use crate::core::models::tissue::TissueType;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};

/// Highest dose bin of the histogram, in Gy.
pub const DVH_MAX_DOSE_GY: usize = 300;

const CGY_PER_GY: f64 = 100.0;

/// Writes the treatment plan as a fixed-width table.
///
/// Needle ids are assigned in order of first use and seed ids follow insertion
/// order, both starting at 1.
pub fn write_treatment_plan<W: Write>(patient: &Patient, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{:<7}{:<6}{:<24}{}", "Needle", "Seed", "Seed Type", "Seed Indices")?;

    let mesh = patient.mesh();
    let mut needle_ids: HashMap<usize, usize> = HashMap::new();
    for (seed_index, seed) in patient.treatment_plan().seeds().iter().enumerate() {
        let column = mesh.column_index(seed.x(), seed.y());
        let next_id = needle_ids.len() + 1;
        let needle_id = *needle_ids.entry(column).or_insert(next_id);
        writeln!(
            writer,
            "{:<7}{:<6}{:<24}{} {} {}",
            needle_id,
            seed_index + 1,
            seed.seed_name(),
            seed.x(),
            seed.y(),
            seed.z()
        )?;
    }
    Ok(())
}

/// One histogram bin: the fraction of each structure receiving at least
/// `dose_gy` Gy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DvhRow {
    pub dose_gy: usize,
    pub prostate: f64,
    pub urethra: f64,
    pub rectum: f64,
    pub normal: f64,
}

/// Cumulative dose-volume histogram over `0..=300` Gy.
///
/// Each voxel is counted once, in the structure the tissue priority chain assigns
/// it to. Margin voxels count as normal tissue.
pub fn dose_volume_histogram(patient: &Patient) -> Vec<DvhRow> {
    // bins[structure][d]: voxels whose dose floors to exactly d Gy (clamped at the top bin)
    let mut bins = [[0usize; DVH_MAX_DOSE_GY + 1]; 4];
    let mut sizes = [0usize; 4];

    for (index, &dose) in patient.dose_distribution().iter().enumerate() {
        let slot = match patient.masks().tissue_type(index) {
            TissueType::Prostate => 0,
            TissueType::Urethra => 1,
            TissueType::Rectum => 2,
            TissueType::Margin | TissueType::Normal => 3,
        };
        let bin = ((dose / CGY_PER_GY).floor().max(0.0) as usize).min(DVH_MAX_DOSE_GY);
        bins[slot][bin] += 1;
        sizes[slot] += 1;
    }

    let mut at_least = [0usize; 4];
    let mut rows: Vec<DvhRow> = (0..=DVH_MAX_DOSE_GY)
        .rev()
        .map(|dose_gy| {
            for slot in 0..4 {
                at_least[slot] += bins[slot][dose_gy];
            }
            let fraction = |slot: usize| {
                if sizes[slot] == 0 {
                    0.0
                } else {
                    at_least[slot] as f64 / sizes[slot] as f64
                }
            };
            DvhRow {
                dose_gy,
                prostate: fraction(0),
                urethra: fraction(1),
                rectum: fraction(2),
                normal: fraction(3),
            }
        })
        .collect();
    rows.reverse();
    rows
}

/// Writes histogram rows as CSV with a `dose_gy,prostate,urethra,rectum,normal`
/// header.
pub fn write_dvh<W: Write>(rows: &[DvhRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fixtures;
    use crate::core::models::position::SeedPosition;
    use crate::core::models::tissue::Organ;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn plan_table_numbers_needles_by_first_use() {
        let mut patient = fixtures::block_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        for indices in [[1, 1, 0], [3, 3, 1], [1, 1, 2]] {
            patient
                .insert_seed(SeedPosition::new(indices, 1.0, source.clone()))
                .unwrap();
        }

        let mut out = Vec::new();
        write_treatment_plan(&patient, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Needle Seed  Seed Type"));
        let fields: Vec<Vec<&str>> = lines[1..]
            .iter()
            .map(|l| l.split_whitespace().collect())
            .collect();
        assert_eq!(fields[0], ["1", "1", "Amersham6711Seed", "1", "1", "0"]);
        assert_eq!(fields[1], ["2", "2", "Amersham6711Seed", "3", "3", "1"]);
        assert_eq!(fields[2], ["1", "3", "Amersham6711Seed", "1", "1", "2"]);
    }

    #[test]
    fn histogram_of_empty_plan_is_full_only_at_zero() {
        let patient = fixtures::block_patient(1000.0);
        let rows = dose_volume_histogram(&patient);
        assert_eq!(rows.len(), DVH_MAX_DOSE_GY + 1);
        assert_eq!(rows[0].prostate, 1.0);
        assert_eq!(rows[0].normal, 1.0);
        assert_eq!(rows[1].prostate, 0.0);
    }

    #[test]
    fn histogram_matches_direct_threshold_counts() {
        let mut patient = fixtures::block_patient(1000.0);
        let source = fixtures::prepared_source(patient.mesh(), 0.5);
        for indices in [[1, 1, 1], [3, 2, 1], [2, 3, 2]] {
            patient
                .insert_seed(SeedPosition::new(indices, 1.0, source.clone()))
                .unwrap();
        }
        let rows = dose_volume_histogram(&patient);

        for row in rows.iter().step_by(7) {
            let threshold = row.dose_gy as f64 * 100.0;
            let expected = patient.organ_coverage(Organ::Prostate, threshold);
            assert!((row.prostate - expected).abs() < TOLERANCE, "bin {}", row.dose_gy);
        }
        assert!(rows.windows(2).all(|w| w[1].prostate <= w[0].prostate));
    }

    #[test]
    fn histogram_reports_zero_for_empty_structures() {
        let patient = fixtures::single_target_patient(1000.0);
        let rows = dose_volume_histogram(&patient);
        assert!(rows.iter().all(|r| r.urethra == 0.0 && r.rectum == 0.0));
    }

    #[test]
    fn dvh_csv_has_expected_header() {
        let rows = [DvhRow {
            dose_gy: 0,
            prostate: 1.0,
            urethra: 0.5,
            rectum: 0.25,
            normal: 0.0,
        }];
        let mut out = Vec::new();
        write_dvh(&rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("dose_gy,prostate,urethra,rectum,normal"));
        assert_eq!(lines.next(), Some("0,1.0,0.5,0.25,0.0"));
    }
}
