//! One module per named rule from the semantic analysis pass, run in the
//! fixed order [`super::standard_rules`] returns.

pub(crate) mod common;

pub mod default_value_type_matches;
pub mod default_value_valid_field;
pub mod enum_fields_well_formed;
pub mod nullable_meaningful;
pub mod unique_default_value;
pub mod unique_field_index;
pub mod unique_field_name;
pub mod valid_base_type;
pub mod valid_field_type;
pub mod valid_list_arguments;
pub mod valid_map_arguments;
