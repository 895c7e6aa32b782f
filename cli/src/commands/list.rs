use crate::error::Result;
use crate::output::OutputManager;

/// Print the registry, one descriptor per kind index.
pub fn run(output: &OutputManager) -> Result<()> {
    output.print_descriptors(dsbench::registry::descriptors())
}
