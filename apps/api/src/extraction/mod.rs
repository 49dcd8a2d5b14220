// Structured extraction from résumé and job-description text.
// Rules are independent pure functions; absence is `None`, never an error.

pub mod handlers;
pub mod jd_skills;
pub mod pdf;
pub mod rules;
pub mod vocabulary;
