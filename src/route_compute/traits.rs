use super::Result;

pub trait RouteComputeEngine<I> {
    type Output;

    fn compute(&self, input: &I) -> Result<Self::Output>;
}
