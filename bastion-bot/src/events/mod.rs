pub mod antinuke;
