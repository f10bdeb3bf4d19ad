use strum::EnumString;

/// Statement keywords recognized by the lexer.
///
/// Keywords are case-insensitive. Type names (`int32`, ...), constraint
/// attributes (`autoincrement`, `unique`) and the bool literals stay plain
/// words; only statement structure is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Keyword {
    Create,
    Table,

    Insert,
    Into,
    Values,

    Select,
    From,
    Where,
}
