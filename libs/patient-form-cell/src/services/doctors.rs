use crate::models::{DoctorId, DoctorRef};

/// Display label of the first doctor with `doctor_id`, if any.
pub fn resolve_doctor_label(doctors: &[DoctorRef], doctor_id: DoctorId) -> Option<String> {
    doctors
        .iter()
        .find(|doctor| doctor.id == doctor_id)
        .map(DoctorRef::display_label)
}

/// Case-insensitive substring match on "first last". An empty query keeps everything.
pub fn filter_doctors(doctors: &[DoctorRef], query: &str) -> Vec<DoctorRef> {
    let needle = query.to_lowercase();
    doctors
        .iter()
        .filter(|doctor| doctor.full_name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(id: DoctorId, first_name: &str, last_name: &str, title: &str) -> DoctorRef {
        DoctorRef {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            title: title.to_string(),
        }
    }

    fn roster() -> Vec<DoctorRef> {
        vec![
            doctor(1, "Anna", "Rossi", "Dr."),
            doctor(2, "Marco", "Bianchi", "Prof."),
        ]
    }

    #[test]
    fn test_resolve_label() {
        assert_eq!(resolve_doctor_label(&roster(), 1).as_deref(), Some("Anna Rossi, Dr."));
        assert_eq!(resolve_doctor_label(&roster(), 9), None);
    }

    #[test]
    fn test_first_match_wins() {
        let mut doctors = roster();
        doctors.push(doctor(1, "Duplicate", "Entry", "Dr."));
        assert_eq!(resolve_doctor_label(&doctors, 1).as_deref(), Some("Anna Rossi, Dr."));
    }

    #[test]
    fn test_filter_matches_substring_ignoring_case() {
        let filtered = filter_doctors(&roster(), "ros");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);

        let filtered = filter_doctors(&roster(), "MARCO B");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
    }

    #[test]
    fn test_filter_spans_first_and_last_name() {
        assert_eq!(filter_doctors(&roster(), "anna rossi").len(), 1);
        assert!(filter_doctors(&roster(), "rossi anna").is_empty());
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        assert_eq!(filter_doctors(&roster(), ""), roster());
    }
}
