/*!
 * Data Structures
 *
 * Small specialized containers shared across the kernel.
 */

mod inline_string;

pub use inline_string::InlineString;
