//! Ready-made labware definitions.
//!
//! Constructors take the instance name and return a fully built resource
//! tree. Dimensions come from vendor specifications.

pub mod flex;
pub mod ml_star;
pub mod plates;

pub use flex::{
    flex_96_tiprack_1000ul, flex_96_tiprack_200ul, flex_96_tiprack_50ul,
};
pub use ml_star::{
    four_ml_tf_l, four_ml_tf_p, five_ml_t_l, five_ml_t_p, ht_l, ht_p, htf_l, htf_p, lt_l, lt_p,
    ltf_l, ltf_p, st_l, st_p, stf_l, stf_p,
};
pub use plates::{cos_96_ez_wash, tube_rack_24x1500ul};
