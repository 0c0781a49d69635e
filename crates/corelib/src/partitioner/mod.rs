//! Grouping policies for the address translator.
//!
//! Partitioners bucket object ids into placement groups. Cooperating
//! processes must use the same partitioner and group count, since the
//! resulting group id is externally observable.

pub mod inode;
pub mod object;
pub mod traits;

pub use inode::InodePartitioner;
pub use object::ObjectPartitioner;
pub use traits::Partitioner;
