pub(crate) mod eligibility;
