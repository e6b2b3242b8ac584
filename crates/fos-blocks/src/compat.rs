//! Compiler Compatibility Lists
//!
//! Native opcodes the compiler hands back to the interpreter instead of
//! compiling. Extensions are never listed here. Keep both lists alphabetical
//! within each category.

/// Stack blocks run through the compatibility layer
pub const STACKED: &[&str] = &[
    "looks_changestretchby",
    "looks_hideallsprites",
    "looks_say",
    "looks_sayforsecs",
    "looks_setstretchto",
    "looks_switchbackdroptoandwait",
    "looks_think",
    "looks_thinkforsecs",
    "motion_align_scene",
    "motion_glidesecstoxy",
    "motion_glideto",
    "motion_goto",
    "motion_pointtowards",
    "motion_scroll_right",
    "motion_scroll_up",
    "sensing_askandwait",
    "sensing_setdragmode",
    "sound_changeeffectby",
    "sound_changevolumeby",
    "sound_cleareffects",
    "sound_play",
    "sound_playuntildone",
    "sound_seteffectto",
    "sound_setvolumeto",
    "sound_stopallsounds",
];

/// Reporter blocks run through the compatibility layer
pub const INPUTS: &[&str] = &[
    "motion_xscroll",
    "motion_yscroll",
    "sensing_loud",
    "sensing_loudness",
    "sensing_userid",
    "sound_volume",
    "json_new_object",
    "json_to_object",
    "json_to_string",
    "json_keys",
    "json_values",
    "json_value_of_key",
    "json_set_key",
    "json_delete_key",
    "json_join_object",
    "json_has_key",
    "json_new_array",
    "json_to_array",
    "json_value_of_index",
    "json_index_of_value",
    "json_add_item",
    "json_replace_index",
    "json_delete_index",
    "json_delete_all_occurrences",
    "json_join_array",
    "json_has_item",
    "comments_object",
    "comments_array",
];

/// Whether the compiler defers `opcode` to the interpreter
pub fn is_compat_block(opcode: &str) -> bool {
    STACKED.contains(&opcode) || INPUTS.contains(&opcode)
}

/// Whether `opcode` is a compatibility stack block
pub fn is_stacked(opcode: &str) -> bool {
    STACKED.contains(&opcode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(is_compat_block("looks_say"));
        assert!(is_compat_block("json_keys"));
        assert!(is_stacked("sound_play"));
        assert!(!is_stacked("json_keys"));
        assert!(!is_compat_block("control_forever"));
    }

    #[test]
    fn test_stacked_sorted() {
        let mut sorted = STACKED.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STACKED);
    }

    #[test]
    fn test_no_duplicates() {
        let mut all: Vec<&str> = STACKED.iter().chain(INPUTS).copied().collect();
        let len = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), len);
    }
}
