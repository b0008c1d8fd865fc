use super::domain::ChecklistItem;

#[derive(Debug, Clone)]
pub struct RequirementTemplate {
    pub key: &'static str,
    pub category: &'static str,
    pub requirement: &'static str,
    pub description: &'static str,
    pub mandatory: bool,
    pub link: Option<&'static str>,
}

/// The regulatory checklist an assessment is scored against.
#[derive(Debug)]
pub struct ComplianceBlueprint {
    requirements: Vec<RequirementTemplate>,
}

impl ComplianceBlueprint {
    pub fn standard() -> Self {
        Self {
            requirements: standard_requirements(),
        }
    }

    pub fn requirements(&self) -> &[RequirementTemplate] {
        &self.requirements
    }

    pub fn requirement(&self, key: &str) -> Option<&RequirementTemplate> {
        self.requirements.iter().find(|req| req.key == key)
    }

    pub fn mandatory_count(&self) -> usize {
        self.requirements.iter().filter(|req| req.mandatory).count()
    }

    /// Checklist state at session start: every item present, nothing satisfied.
    pub fn empty_checklist(&self) -> Vec<ChecklistItem> {
        self.requirements
            .iter()
            .map(|req| ChecklistItem {
                key: req.key.to_string(),
                mandatory: req.mandatory,
                satisfied: false,
            })
            .collect()
    }

    /// Checklist with the named items ticked; unknown keys are ignored.
    pub fn checklist_with_satisfied(&self, satisfied_keys: &[String]) -> Vec<ChecklistItem> {
        self.requirements
            .iter()
            .map(|req| ChecklistItem {
                key: req.key.to_string(),
                mandatory: req.mandatory,
                satisfied: satisfied_keys.iter().any(|key| key == req.key),
            })
            .collect()
    }
}

fn standard_requirements() -> Vec<RequirementTemplate> {
    vec![
        RequirementTemplate {
            key: "nerc_embedded_generation_license",
            category: "NERC (Nigerian Electricity Regulatory Commission)",
            requirement: "Embedded Generation License Application",
            description: "Required for solar installations > 1MW or grid-connected systems",
            mandatory: true,
            link: Some("https://nerc.gov.ng"),
        },
        RequirementTemplate {
            key: "nerc_grid_connection_agreement",
            category: "NERC",
            requirement: "Grid Connection Agreement",
            description: "Agreement with Distribution Company (DisCo) for grid interconnection",
            mandatory: true,
            link: Some("https://nerc.gov.ng"),
        },
        RequirementTemplate {
            key: "son_equipment_standards",
            category: "SON (Standards Organisation of Nigeria)",
            requirement: "Equipment Standards Compliance",
            description: "Solar panels and inverters must meet Nigerian Industrial Standards (NIS)",
            mandatory: true,
            link: Some("https://son.gov.ng"),
        },
        RequirementTemplate {
            key: "nesrea_environmental_assessment",
            category: "NESREA (Environmental Agency)",
            requirement: "Environmental Impact Assessment",
            description: "Required for large-scale installations (>10MW typically)",
            mandatory: false,
            link: Some("https://nesrea.gov.ng"),
        },
        RequirementTemplate {
            key: "local_building_permits",
            category: "Local Government",
            requirement: "Building/Construction Permits",
            description: "Local permits for structural modifications and installations",
            mandatory: true,
            link: None,
        },
        RequirementTemplate {
            key: "fire_safety_clearance",
            category: "Fire Safety",
            requirement: "Fire Safety Compliance",
            description: "Fire safety clearance for commercial installations",
            mandatory: true,
            link: None,
        },
        RequirementTemplate {
            key: "project_insurance",
            category: "Insurance",
            requirement: "Project Insurance Coverage",
            description: "Comprehensive insurance for PPA project assets",
            mandatory: false,
            link: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_blueprint_has_seven_requirements_five_mandatory() {
        let blueprint = ComplianceBlueprint::standard();
        assert_eq!(blueprint.requirements().len(), 7);
        assert_eq!(blueprint.mandatory_count(), 5);
    }

    #[test]
    fn empty_checklist_mirrors_requirement_flags() {
        let blueprint = ComplianceBlueprint::standard();
        let checklist = blueprint.empty_checklist();
        assert_eq!(checklist.len(), 7);
        for (item, req) in checklist.iter().zip(blueprint.requirements()) {
            assert_eq!(item.key, req.key);
            assert_eq!(item.mandatory, req.mandatory);
            assert!(!item.satisfied);
        }
    }

    #[test]
    fn checklist_with_satisfied_ignores_unknown_keys() {
        let blueprint = ComplianceBlueprint::standard();
        let checklist = blueprint.checklist_with_satisfied(&[
            "son_equipment_standards".to_string(),
            "not_a_requirement".to_string(),
        ]);
        let satisfied: Vec<_> = checklist.iter().filter(|item| item.satisfied).collect();
        assert_eq!(satisfied.len(), 1);
        assert_eq!(satisfied[0].key, "son_equipment_standards");
    }
}
