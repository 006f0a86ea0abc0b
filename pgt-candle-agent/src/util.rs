//! Utilities.
use anyhow::{anyhow, Context, Result};
use candle_nn::VarMap;

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .with_context(|| format!("Variable {} is not found in the source", k_dest))?;
        let t_src = v_src.as_tensor();
        let t_dest = v_dest.as_tensor();
        let t_dest = ((tau * t_src)? + ((1.0 - tau) * t_dest)?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Copies the values of variables in `src` to the variables in `dest` with the same names.
///
/// Storages are not shared after copying.
pub fn copy_params(dest: &VarMap, src: &VarMap) -> Result<()> {
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .with_context(|| format!("Variable {} is not found in the source", k_dest))?;
        v_dest.set(v_src.as_tensor())?;
    }

    Ok(())
}

/// Exponential moving average, `avg * decay + (1 - decay) * value`.
pub fn moving_average(avg: f32, decay: f64, value: f32) -> f32 {
    (avg as f64 * decay + (1.0 - decay) * value as f64) as f32
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device, Tensor};
    use candle_nn::Init;

    fn varmap(values: &[f32]) -> Result<VarMap> {
        let vm = VarMap::new();
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        let t = Tensor::from_slice(values, (values.len(),), &Device::Cpu)?;
        vm.get((values.len(),), "var1", init, DType::F32, &Device::Cpu)?;
        set(&vm, &t)?;
        Ok(vm)
    }

    fn set(vm: &VarMap, t: &Tensor) -> Result<()> {
        let data = vm.data().lock().map_err(|e| anyhow!("{}", e))?;
        data["var1"].set(t)?;
        Ok(())
    }

    fn values(vm: &VarMap) -> Result<Vec<f32>> {
        let data = vm.data().lock().map_err(|e| anyhow!("{}", e))?;
        Ok(data["var1"].as_tensor().to_vec1::<f32>()?)
    }

    #[test]
    fn test_track() -> Result<()> {
        let src = [1.0f32, 2.0, 3.0];
        let dest = [4.0f32, 5.0, 6.0];
        let tau = 0.7f32;
        let vm_src = varmap(&src)?;
        let vm_dest = varmap(&dest)?;
        track(&vm_dest, &vm_src, tau as f64)?;

        let expected = src
            .iter()
            .zip(dest.iter())
            .map(|(s, d)| tau * s + (1.0 - tau) * d)
            .collect::<Vec<_>>();
        assert!((expected[0] - 1.9).abs() < 1e-5);
        for (v, e) in values(&vm_dest)?.iter().zip(expected) {
            assert!((v - e).abs() < 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_copy_params_does_not_share_storage() -> Result<()> {
        let vm_src = varmap(&[1.0, 2.0, 3.0])?;
        let vm_dest = varmap(&[4.0, 5.0, 6.0])?;
        copy_params(&vm_dest, &vm_src)?;
        assert_eq!(values(&vm_dest)?, vec![1.0, 2.0, 3.0]);

        set(&vm_src, &Tensor::zeros(3, DType::F32, &Device::Cpu)?)?;
        assert_eq!(values(&vm_dest)?, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_moving_average() {
        assert!((moving_average(0.0, 0.99, 1.0) - 0.01).abs() < 1e-7);
        assert!((moving_average(1.0, 0.5, 3.0) - 2.0).abs() < 1e-7);
    }
}
