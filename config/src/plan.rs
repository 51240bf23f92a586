use serde::Deserialize;

#[derive(Deserialize)]
pub struct PlanConfig {
    name: String,
    #[serde(default)]
    description: String,
    price: i64,
    #[serde(default)]
    features: Vec<String>,
    max_projects: Option<i32>,
}

impl PlanConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> &i64 {
        &self.price
    }

    pub fn features(&self) -> &Vec<String> {
        &self.features
    }

    pub fn max_projects(&self) -> &Option<i32> {
        &self.max_projects
    }
}
