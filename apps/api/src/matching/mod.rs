// Skill matching: set-overlap score, fit tier, and gap suggestions.

pub mod handlers;
pub mod scorer;
pub mod skill_set;
pub mod suggestions;
